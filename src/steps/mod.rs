//! Step records produced by clients or by the decomposer.
//!
//! Steps arrive as loosely-shaped JSON objects tagged by a `type` field.
//! They are converted into a closed [`Step`] enum at the boundary so the
//! rest of the system matches exhaustively; shapes that are not recognized
//! become [`Step::Unsupported`] instead of failing the whole list.

mod step;

pub use step::{
    cell_text, parse_headers, parse_rows, Step, StepKind, BROWSER_TYPE, SPREADSHEET_TYPE,
};
