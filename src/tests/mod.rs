pub mod support;

mod watch_list_tests;
