//! The built-in training-video catalog.
//!
//! Static, locally-held reference data consumed by the presentation layer.
//! The workflow never reads it.

use serde::Serialize;

/// One playable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoEntry {
  pub id:        &'static str,
  pub category:  &'static str,
  pub title:     &'static str,
  /// Display duration, `m:ss`.
  pub duration:  &'static str,
  pub thumbnail: &'static str,
  /// Playable (embeddable) media reference.
  pub url:       &'static str,
}

/// Every video shipped with the app, in display order.
pub const CATALOG: &[VideoEntry] = &[
  VideoEntry {
    id:        "1",
    category:  "Basic Commands",
    title:     "Sit",
    duration:  "3:03",
    thumbnail: "https://img.youtube.com/vi/qExwIfed7jg/0.jpg",
    url:       "https://www.youtube.com/embed/qExwIfed7jg",
  },
  VideoEntry {
    id:        "2",
    category:  "Basic Commands",
    title:     "Stay",
    duration:  "4:14",
    thumbnail: "https://img.youtube.com/vi/RndMTsZTpMo/0.jpg",
    url:       "https://www.youtube.com/embed/RndMTsZTpMo",
  },
  VideoEntry {
    id:        "3",
    category:  "Behavioral Training",
    title:     "Barking",
    duration:  "3:53",
    thumbnail: "https://img.youtube.com/vi/pZkzdsjtWc0/0.jpg",
    url:       "https://www.youtube.com/embed/pZkzdsjtWc0",
  },
  VideoEntry {
    id:        "4",
    category:  "Behavioral Training",
    title:     "Chewing",
    duration:  "5:00",
    thumbnail: "https://img.youtube.com/vi/CZuo57SbFJc/0.jpg",
    url:       "https://www.youtube.com/embed/CZuo57SbFJc",
  },
  VideoEntry {
    id:        "5",
    category:  "Advanced Training",
    title:     "Heel",
    duration:  "6:05",
    thumbnail: "https://img.youtube.com/vi/Eh3vvSbbGd0/0.jpg",
    url:       "https://www.youtube.com/embed/Eh3vvSbbGd0",
  },
  VideoEntry {
    id:        "6",
    category:  "Advanced Training",
    title:     "Recall",
    duration:  "4:35",
    thumbnail: "https://img.youtube.com/vi/aptya2T2_3M/0.jpg",
    url:       "https://www.youtube.com/embed/aptya2T2_3M",
  },
];

/// Case-insensitive filter over title and category. An empty or whitespace
/// query returns the whole catalog.
pub fn search(query: &str) -> Vec<&'static VideoEntry> {
  let q = query.trim().to_lowercase();
  if q.is_empty() {
    return CATALOG.iter().collect();
  }
  CATALOG
    .iter()
    .filter(|v| {
      v.title.to_lowercase().contains(&q) || v.category.to_lowercase().contains(&q)
    })
    .collect()
}
