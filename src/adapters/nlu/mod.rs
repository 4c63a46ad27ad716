//! Intent recognizer adapter. Implements RecognizerPort.

pub mod luis_adapter;
pub mod mapper;

pub use luis_adapter::LuisRecognizer;
pub use mapper::get_time_entity;
