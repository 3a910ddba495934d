pub mod observation;
pub mod series;
pub mod splitter;
