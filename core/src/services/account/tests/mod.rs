//! Account service test suite.

mod mocks;

mod invite_tests;
