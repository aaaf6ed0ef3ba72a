pub mod save;

pub use save::{
    list_saves, load_latest_valid_save, load_world, save_world, SaveError, SaveMetadata,
    SaveRecord,
};
