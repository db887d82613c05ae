pub mod codec;
pub mod containers;
pub mod data_serializer;
pub mod data_store;
pub mod encoded_array;
pub mod pipeline;
pub mod prefab_codec;
pub mod save_error;
mod save_plugin;
pub mod selector;
pub mod settings_file;


pub use codec::{ContainerDecoder, DecodeInput, PopulatedBuffer, StandardDecoder, TreeCodec};
pub use data_store::{DataStore, SerializableData};
pub use pipeline::{load_trees, save_trees, TreeLoadReport, TreeSaveReport};
pub use prefab_codec::SimulationPrefabs;
pub use save_error::SaveError;
pub use save_plugin::{handle_load_events, LoadTreesEvent, SaveTreesEvent, TreeSavePlugin};
pub use selector::{select, Selection, SelectionOutcome, SelectorState};
pub use settings_file::{load_settings, save_settings};
