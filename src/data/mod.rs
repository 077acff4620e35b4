/// Data layer: vasprun extraction, typed model, orbital classification.
///
/// Architecture:
/// ```text
///   vasprun.xml
///        │
///        ▼
///   ┌──────────┐
///   │ accessor  │  query the parsed tree → typed numeric arrays
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  bases, k-points (+grid shape), eigenvalues, projections
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ orbitals  │  ion-summed weights → per-band character labels
///   └──────────┘
/// ```
pub mod accessor;
pub mod model;
pub mod orbitals;
