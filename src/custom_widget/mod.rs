pub mod status_lamp;
