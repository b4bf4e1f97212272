mod helpers;

mod backend_tests;
mod read_tests;
