pub mod clear;
pub mod config;
pub mod context;
pub mod interactive;
pub mod prompts;
pub mod search;
pub mod watched;
