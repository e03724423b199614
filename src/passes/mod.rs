//! Tree-rewriting passes.
//!
//! Each pass mutates a [`Document`](crate::dom::Document) in place. Passes
//! that read the source document and write the template take both.
//!
//! ## Pipeline Order
//!
//! [`munge`](crate::pipeline::munge) runs the passes in a fixed order; later
//! passes rely on what earlier ones leave behind:
//!
//! 1. **Relative links** - prefix template asset paths
//! 2. **Mtime** - stamp the template with the source's modification time
//! 3. **Remove h1** - the template supplies the page heading
//! 4. **API links** - link `class="API"` names to reference docs
//! 5. **Fontify** - highlight inline Python blocks
//! 6. **Fix links** - swap `.html` for the output extension
//! 7. **Listings** - pull in external files (py, html, plain)
//! 8. **Table of contents** - anchor headings, build the list in the template
//! 9. **Footnotes** - number and collect at the end of the body
//! 10. **Notes** - add the "Note:" label
//! 11. **Index** - turn index terms into numbered anchors
//! 12. **Version**, **Title**, **Authors** - fill template slots

pub mod links;
pub mod listings;
pub mod metadata;
pub mod notes;
pub mod toc;

pub use links::{fix_api, fix_links, fix_relative_links};
pub use listings::{ListingKind, add_html_listings, add_plain_listings, add_py_listings, fontify_python};
pub use metadata::{
    Author, add_mtime, document_authors, document_title, remove_h1, set_authors, set_title,
    set_version,
};
pub use notes::{footnotes, index, notes};
pub use toc::{HeadingRecord, TocLevels, build_toc, collect_headings, generate_toc, put_in_toc};
