#[cfg(test)]
mod common;
