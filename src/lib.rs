pub mod answer_evaluator;
pub mod cli;
pub mod database;
pub mod database_factory;
pub mod date_provider;
pub mod distractors;
pub mod error;
pub mod geometry;
pub mod quiz_item;
pub mod quiz_service;
pub mod row_factories;
pub mod seed;
pub mod session;
pub mod spaced_repetition;
pub mod terminal;
pub mod time_format;
