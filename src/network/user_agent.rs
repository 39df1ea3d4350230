//! Browser header values for page fetches

use rand::seq::SliceRandom;

/// Desktop platforms that news sites serve full article markup to
const PLATFORMS: [&str; 4] = [
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

const CHROME_VERSIONS: [&str; 4] = ["122.0.0.0", "123.0.0.0", "124.0.0.0", "125.0.0.0"];

const FIREFOX_VERSIONS: [&str; 3] = ["123.0", "124.0", "125.0"];

/// Generate a realistic desktop user agent
///
/// Two out of three picks are Chrome, the rest Firefox.
pub fn generate_user_agent() -> String {
    let mut rng = rand::thread_rng();
    let platform = PLATFORMS.choose(&mut rng).copied().unwrap_or(PLATFORMS[0]);

    match [0u8, 0, 1].choose(&mut rng) {
        Some(1) => {
            let version = FIREFOX_VERSIONS
                .choose(&mut rng)
                .copied()
                .unwrap_or(FIREFOX_VERSIONS[0]);
            format!(
                "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
                platform, version, version
            )
        }
        _ => {
            let version = CHROME_VERSIONS
                .choose(&mut rng)
                .copied()
                .unwrap_or(CHROME_VERSIONS[0]);
            format!(
                "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
                platform, version
            )
        }
    }
}

/// Accept header preferring HTML and XML
pub fn accept_html() -> &'static str {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
}

/// Accept-Language header sent with every request
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
