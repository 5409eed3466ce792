mod annotation_tests;
mod removal_tests;
