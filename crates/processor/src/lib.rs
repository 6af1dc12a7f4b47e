//! OpenAPI hierarchy processing
//!
//! Turns a flat OpenAPI spec whose operations carry ordered tag lists into a
//! processed spec plus a hierarchy file.
//!
//! ## Processing Steps
//!
//! 1. **Extraction**: each tag list `[a, b, c]` is read root to leaf and
//!    inserted into the hierarchy tree (`a` contains `b` contains `c`).
//! 2. **Collapsing**: every operation keeps only its leaf tag.
//! 3. **Placeholders**: tags that never own an operation get a
//!    `GET /dummy/<slug>` operation so the generator still emits a class.
//! 4. **Normalization**: const-only `oneOf` to `enum`, defaults imply
//!    optional, `Error` relaxation, list-unwrap marking.
//!
//! ## Usage
//! ```rust,ignore
//! use api_hierarchy_processor::SpecProcessor;
//!
//! let processed = SpecProcessor::from_file("openapi.generator.yml")?.process()?;
//! processed.write_spec(Path::new("openapi-processed.yml"))?;
//! processed.write_hierarchy(Path::new("api-hierarchy.yml"))?;
//! ```

mod extractor;
mod normalizer;
mod processor;

pub use extractor::{extract, EndpointRecord, Extraction, PlaceholderCollision, HTTP_METHODS};
pub use normalizer::{
    convert_oneof_const_to_enum, fix_oneof_const_schemas, mark_list_responses, normalize,
    relax_error_schema, relax_required_with_defaults, NormalizationReport, UnwrappedOperation,
    PAGINATION_FIELDS, UNWRAP_EXTENSION,
};
pub use processor::{ProcessedSpec, SpecProcessor};
