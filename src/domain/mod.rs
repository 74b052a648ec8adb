pub mod city_allocation;
pub mod forecast;
pub mod grid_snapshot;
pub mod history;
