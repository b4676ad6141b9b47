//! Noise (bot) filters
//!
//! Per-network sets of nicks whose lines are not counted as activity.
//! Names are compared case-insensitively.

use std::collections::{HashMap, HashSet};

/// Known bots, per network.
const DEFAULT_FILTERS: &[(&str, &[&str])] = &[
    ("2600net", &["jarvis", "gbot", "bitbot"]),
    ("darkscience", &["djbot", "zeta"]),
    ("efnet", &["pelosi"]),
    ("installgentoo", &["gtrackerbot5"]),
    (
        "freenode",
        &[
            "buttsbot",
            "fedbot",
            "imoutobot",
            "jellobot",
            "machabot",
            "minetestbot",
            "mockturtle",
            "reddit-bot",
            "weebot",
            "wlb1",
            "zero1",
        ],
    ),
    ("gitter", &["gitter"]),
    ("gotham", &["mafalda", "southbay", "damon"]),
    ("rizon", &["internets", "chanstat", "yt-info"]),
    ("tilde_chat", &["bitbot", "tildebot"]),
    ("snoonet", &["gonzobot", "jesi", "shinymetal", "subwatch", "nsa"]),
    ("supernets", &["scroll", "cancer"]),
];

/// Nicks to ignore, keyed by network token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseFilters {
    by_network: HashMap<String, HashSet<String>>,
}

impl NoiseFilters {
    /// No filtering at all.
    pub fn disabled() -> Self {
        Self {
            by_network: HashMap::new(),
        }
    }

    /// Build filters from a network → nicks mapping.
    pub fn from_map<N, I, S>(map: impl IntoIterator<Item = (N, I)>) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let by_network = map
            .into_iter()
            .map(|(network, nicks)| {
                let nicks = nicks
                    .into_iter()
                    .map(|nick| nick.as_ref().to_lowercase())
                    .collect();
                (network.into(), nicks)
            })
            .collect();
        Self { by_network }
    }

    /// Lower-cased nicks filtered on `network`; empty if none are configured.
    pub fn for_network(&self, network: &str) -> NoiseSet<'_> {
        NoiseSet(self.by_network.get(network))
    }

    pub fn is_empty(&self) -> bool {
        self.by_network.is_empty()
    }
}

impl Default for NoiseFilters {
    /// The built-in table of known bots.
    fn default() -> Self {
        Self::from_map(
            DEFAULT_FILTERS
                .iter()
                .map(|(network, nicks)| (*network, nicks.iter().copied())),
        )
    }
}

/// The noise set applying to one source.
#[derive(Debug, Clone, Copy)]
pub struct NoiseSet<'a>(Option<&'a HashSet<String>>);

impl NoiseSet<'_> {
    /// A set that filters nothing.
    pub fn empty() -> Self {
        Self(None)
    }

    /// Whether `nick` is noise, ignoring case.
    ///
    /// The underlying set must hold lower-cased names, as [`NoiseFilters`] does.
    pub fn contains(&self, nick: &str) -> bool {
        self.0.map_or(false, |set| set.contains(&nick.to_lowercase()))
    }
}
