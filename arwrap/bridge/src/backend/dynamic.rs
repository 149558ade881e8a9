use arw_api::NativeEngine;
use libloading::{Library, Symbol};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::BridgeError;

macro_rules! declare_dynamic_backend {
    ($( fn $name:ident = $symbol:literal ( $( $arg:ident : $ty:ty ),* $(,)? ) $( -> $ret:ty )? ; )*) => {
        struct SymbolTable {
            $( $name: unsafe extern "C" fn($( $ty ),*) $( -> $ret )?, )*
        }

        impl SymbolTable {
            /// Resolve every catalog entry, failing on the first missing one.
            unsafe fn resolve(lib: &Library, path: &Path) -> Result<Self, BridgeError> {
                Ok(Self {
                    $(
                        $name: {
                            let symbol: Symbol<unsafe extern "C" fn($( $ty ),*) $( -> $ret )?> = lib
                                .get(concat!($symbol, "\0").as_bytes())
                                .map_err(|source| BridgeError::MissingSymbol {
                                    path: path.to_path_buf(),
                                    symbol: $symbol,
                                    source,
                                })?;
                            *symbol
                        },
                    )*
                })
            }
        }

        impl NativeEngine for DynamicBackend {
            $(
                #[allow(clippy::too_many_arguments)]
                unsafe fn $name(&self, $( $arg: $ty ),*) $( -> $ret )? {
                    (self.table.$name)($( $arg ),*)
                }
            )*
        }
    };
}

arw_api::native_catalog!(declare_dynamic_backend);

/// Engine loaded from a shared library at runtime.
///
/// The library stays loaded for as long as this value lives; the resolved
/// function pointers in the table must not outlive it.
pub struct DynamicBackend {
    table: SymbolTable,
    path: PathBuf,
    _lib: Library,
}

impl DynamicBackend {
    /// Platform file name of the wrapper library, e.g. `libARWrapper.so`.
    pub fn library_file_name() -> OsString {
        libloading::library_filename(super::LIBRARY_NAME)
    }

    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        log::debug!("Loading native engine from {:?}", path);
        unsafe {
            let lib = Library::new(path).map_err(|source| BridgeError::BackendUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
            let table = SymbolTable::resolve(&lib, path)?;
            log::info!("Loaded native engine {:?}", path);
            Ok(Self {
                table,
                path: path.to_path_buf(),
                _lib: lib,
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
