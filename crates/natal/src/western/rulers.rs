//! Sign rulers for Western astrology.
//!
//! Maps zodiac signs to their traditional planetary rulers.

use crate::bodies::Body;
use crate::zodiac::ZodiacSign;

/// Traditional rulerships, in sign ring order
const TRADITIONAL_RULERS: [Body; 12] = [
    Body::Mars,    // Aries
    Body::Venus,   // Taurus
    Body::Mercury, // Gemini
    Body::Moon,    // Cancer
    Body::Sun,     // Leo
    Body::Mercury, // Virgo
    Body::Venus,   // Libra
    Body::Mars,    // Scorpio
    Body::Jupiter, // Sagittarius
    Body::Saturn,  // Capricorn
    Body::Saturn,  // Aquarius
    Body::Jupiter, // Pisces
];

/// Get sign ruler (traditional rulership)
pub fn sign_ruler(sign: ZodiacSign) -> Body {
    TRADITIONAL_RULERS[sign.index()]
}

/// Signs ruled by a body
pub fn ruled_signs(body: Body) -> Vec<ZodiacSign> {
    ZodiacSign::ALL
        .iter()
        .copied()
        .filter(|sign| sign_ruler(*sign) == body)
        .collect()
}
