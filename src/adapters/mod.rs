// Adapters layer: concrete record stores the engine can run against.

pub mod storage;
