pub mod directory;
mod path_parser;

pub use directory::{
    Directory, DirectoryLoadError, EditError, LoadError, RecordSaver, SaveError, META_DIR,
};
pub use path_parser::{
    construct_path_from_key, parse_date, parse_key_from_path, ParseError, RecordKey,
};
