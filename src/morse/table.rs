//! Static ITU Morse symbol table.
//!
//! Keys are uppercase characters. Values use `.` for a dot, `-` for a dash
//! and a lone `/` for the word separator emitted for a space.

/// Pattern string used for the word separator.
pub const WORD_SEPARATOR: &str = "/";

static MORSE_TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
    (' ', WORD_SEPARATOR),
];

/// Look up the pattern string for an already-uppercased character.
pub fn lookup(ch: char) -> Option<&'static str> {
    MORSE_TABLE
        .iter()
        .find(|(key, _)| *key == ch)
        .map(|(_, code)| *code)
}

/// Every character the table knows about.
pub fn supported_chars() -> impl Iterator<Item = char> {
    MORSE_TABLE.iter().map(|(key, _)| *key)
}
