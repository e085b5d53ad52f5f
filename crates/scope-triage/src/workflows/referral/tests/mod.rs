mod common;
mod fitness;
