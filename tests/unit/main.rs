//! Unit tests, laid out to mirror `src/`

mod algorithm;
mod spatial;
