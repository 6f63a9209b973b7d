pub mod canvas;
pub mod interpreter;
pub mod storage;
pub mod value;
pub mod verb;

#[cfg(test)]
mod tests;
