use rand::Rng;
use rand::seq::IndexedRandom;

const WORDS: &[&str] = &[
    "amber", "anchor", "apple", "arrow", "aspen", "autumn", "badge", "basil", "beacon", "birch",
    "blossom", "breeze", "brook", "canyon", "cedar", "cinder", "clover", "comet", "coral",
    "crystal", "dawn", "delta", "dune", "ember", "falcon", "fern", "field", "flint", "forest",
    "frost", "garnet", "glade", "harbor", "hazel", "heron", "island", "ivory", "jade", "juniper",
    "lagoon", "lantern", "maple", "meadow", "mist", "moss", "nectar", "oak", "ocean", "orchid",
    "pebble", "pine", "plume", "quartz", "raven", "reef", "ridge", "river", "saffron", "sage",
    "shadow", "sierra", "spark", "spruce", "stone", "summit", "thistle", "thunder", "tide",
    "timber", "valley", "willow", "winter", "zephyr",
];

/// Random `<word>-<word>-<6 digits>` nickname for new accounts.
pub fn generate_random_nickname() -> String {
    let mut rng = rand::rng();
    let first = WORDS.choose(&mut rng).copied().unwrap_or("quiet");
    let second = WORDS.choose(&mut rng).copied().unwrap_or("reader");
    let number: u32 = rng.random_range(100_000..=999_999);
    format!("{first}-{second}-{number}")
}
