//! Integer codes shared with the engine.
//!
//! Each type is a thin wrapper around the raw `i32` the engine understands.
//! Codes outside the named constants are passed through unchanged; the engine
//! decides what they mean.

macro_rules! option_code {
    ($(#[$meta:meta])* $name:ident { $($(#[$cmeta:meta])* $konst:ident = $value:expr,)* }) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub i32);

        impl $name {
            $($(#[$cmeta])* pub const $konst: Self = Self($value);)*

            pub const fn code(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(code: i32) -> Self {
                Self(code)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

option_code! {
    /// Per-marker option selector for the `marker_option_*` accessors.
    MarkerOption {
        FILTERED = 1,
        FILTER_SAMPLE_RATE = 2,
        FILTER_CUTOFF_FREQ = 3,
        SQUARE_USE_CONT_POSE_ESTIMATION = 4,
        SQUARE_CONFIDENCE = 5,
        SQUARE_CONFIDENCE_CUTOFF = 6,
        NFT_SCALE = 7,
        MULTI_MIN_SUBMARKERS = 8,
        MULTI_MIN_CONF_MATRIX = 9,
        MULTI_MIN_CONF_PATTERN = 10,
    }
}

option_code! {
    ThresholdMode {
        MANUAL = 0,
        AUTO_MEDIAN = 1,
        AUTO_OTSU = 2,
        AUTO_ADAPTIVE = 3,
        AUTO_BRACKETING = 4,
    }
}

option_code! {
    LabelingMode {
        WHITE_REGION = 0,
        BLACK_REGION = 1,
    }
}

option_code! {
    PatternDetectionMode {
        TEMPLATE_MATCHING_COLOR = 0,
        TEMPLATE_MATCHING_MONO = 1,
        MATRIX_CODE_DETECTION = 2,
        TEMPLATE_MATCHING_COLOR_AND_MATRIX = 3,
        TEMPLATE_MATCHING_MONO_AND_MATRIX = 4,
    }
}

option_code! {
    MatrixCodeType {
        CODE_3X3 = 0x03,
        CODE_3X3_PARITY65 = 0x103,
        CODE_3X3_HAMMING63 = 0x203,
        CODE_4X4 = 0x04,
        CODE_4X4_BCH_13_9_3 = 0x304,
        CODE_4X4_BCH_13_5_5 = 0x404,
        CODE_5X5 = 0x05,
        CODE_6X6 = 0x06,
        GLOBAL_ID = 0xb0e,
    }
}

option_code! {
    ImageProcMode {
        FRAME_IMAGE = 0,
        FIELD_IMAGE = 1,
    }
}
