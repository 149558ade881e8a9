use arw_api::NativeEngine;

macro_rules! declare_static_backend {
    ($( fn $name:ident = $symbol:literal ( $( $arg:ident : $ty:ty ),* $(,)? ) $( -> $ret:ty )? ; )*) => {
        mod ffi {
            #[link(name = "ARWrapper", kind = "static")]
            extern "C" {
                $(
                    #[link_name = $symbol]
                    pub fn $name($( $arg: $ty ),*) $( -> $ret )?;
                )*
            }
        }

        impl NativeEngine for StaticBackend {
            $(
                #[allow(clippy::too_many_arguments)]
                unsafe fn $name(&self, $( $arg: $ty ),*) $( -> $ret )? {
                    ffi::$name($( $arg ),*)
                }
            )*
        }
    };
}

arw_api::native_catalog!(declare_static_backend);

/// Engine linked directly into the host binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBackend;
