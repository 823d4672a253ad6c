//! Component-level tests, one module per source file under src/components

mod test_channel;
mod test_mod;
mod test_mode;
mod test_platform;
mod test_serializer;
