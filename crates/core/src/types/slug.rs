//! URL slug normalisation.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("static slug pattern is valid"));

/// Turn a display label into a URL slug.
///
/// Lower-cases, transliterates accented letters to ASCII, spells `&` as
/// `and`, collapses any run of other characters to a single `-` and trims
/// dashes from both ends.
///
/// ```
/// use zym_power_core::slugify;
///
/// assert_eq!(slugify("Brûleur de Graisse"), "bruleur-de-graisse");
/// assert_eq!(slugify("Bars & Snacks"), "bars-and-snacks");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let ascii = unidecode::unidecode(input).to_lowercase().replace('&', "and");
    NON_ALNUM
        .replace_all(&ascii, "-")
        .trim_matches('-')
        .to_string()
}
