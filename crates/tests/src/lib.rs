#[cfg(test)]
mod common;

#[cfg(test)]
mod search_api_tests;

#[cfg(test)]
mod search_history_tests;

#[cfg(test)]
mod service_tests;

#[cfg(test)]
mod pg_search_tests;
