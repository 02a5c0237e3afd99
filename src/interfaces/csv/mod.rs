pub mod booking_writer;
pub mod traveler_reader;
