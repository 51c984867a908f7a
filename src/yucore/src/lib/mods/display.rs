// This file is part of the yutils package.
//
// For the full copyright and license information, please view the LICENSE
// file that was distributed with this source code.

//! Quoting of possibly hostile file names in diagnostics.
//!
//! ```
//! use yucore::display::Quotable;
//!
//! let path = "foo/bar.baz";
//! println!("Failed to open {}", path.quote()); // Failed to open 'foo/bar.baz'
//! ```

pub use os_display::Quotable;
