mod helpers;

mod reset_test;
