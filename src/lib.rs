pub mod catalog;
pub mod conversion_handler;
pub mod convert;
pub mod error;
pub mod mutation_handler;
pub mod pizza;
pub mod router;
pub mod validation_handler;

#[cfg(test)]
mod test_util;




#[cfg(test)]
mod conversion_handler_test;
