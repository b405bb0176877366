pub mod service;

mod macros;
