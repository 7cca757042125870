// Chope — Tick phases
//
// Each module is one stage of the cooperative scheduler tick:
// channel drain, decode pump, motion sampling.  The audio controller sits
// between them and owns the playback state.

pub mod audio;
pub mod channel;
pub mod pump;
pub mod sensor;
