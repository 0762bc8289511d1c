pub mod fixtures;

#[cfg(test)]
mod follow_tag_tests;
#[cfg(test)]
mod feed_session_tests;
