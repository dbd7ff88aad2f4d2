// Library root
// -----------
// This crate exposes a small library surface for the uploader CLI. The
// binary (`main.rs`) uses these modules to index local face photos into
// a remote collection and then search that collection by image.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the face-recognition
//   service (index a face into the collection, search by image).
// - `driver`: Derives external ids from photo filenames, enumerates the
//   local photo directory, and runs the batch index + search sequence.
//
// Keeping this separation makes the id parsing and batch enumeration
// testable without touching the network.
pub mod api;
pub mod driver;
