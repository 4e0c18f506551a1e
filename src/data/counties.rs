//! Kenyan county codes, used to join names that differ in spelling.

/// (code, canonical name, folded spelling variants)
const COUNTIES: [(u8, &str, &[&str]); 47] = [
    (1, "Mombasa", &[]),
    (2, "Kwale", &[]),
    (3, "Kilifi", &[]),
    (4, "Tana River", &[]),
    (5, "Lamu", &[]),
    (6, "Taita-Taveta", &["taita"]),
    (7, "Garissa", &[]),
    (8, "Wajir", &[]),
    (9, "Mandera", &[]),
    (10, "Marsabit", &[]),
    (11, "Isiolo", &[]),
    (12, "Meru", &[]),
    (13, "Tharaka-Nithi", &["tharaka"]),
    (14, "Embu", &[]),
    (15, "Kitui", &[]),
    (16, "Machakos", &[]),
    (17, "Makueni", &[]),
    (18, "Nyandarua", &[]),
    (19, "Nyeri", &[]),
    (20, "Kirinyaga", &[]),
    (21, "Murang'a", &[]),
    (22, "Kiambu", &[]),
    (23, "Turkana", &[]),
    (24, "West Pokot", &["pokot"]),
    (25, "Samburu", &[]),
    (26, "Trans Nzoia", &[]),
    (27, "Uasin Gishu", &[]),
    (28, "Elgeyo-Marakwet", &["keiyomarakwet", "elgeyo", "marakwet"]),
    (29, "Nandi", &[]),
    (30, "Baringo", &[]),
    (31, "Laikipia", &[]),
    (32, "Nakuru", &[]),
    (33, "Narok", &[]),
    (34, "Kajiado", &[]),
    (35, "Kericho", &[]),
    (36, "Bomet", &[]),
    (37, "Kakamega", &[]),
    (38, "Vihiga", &[]),
    (39, "Bungoma", &[]),
    (40, "Busia", &[]),
    (41, "Siaya", &[]),
    (42, "Kisumu", &[]),
    (43, "Homa Bay", &[]),
    (44, "Migori", &[]),
    (45, "Kisii", &["kisiicentral"]),
    (46, "Nyamira", &[]),
    (47, "Nairobi", &["nairobicity"]),
];

/// Number of counties in Kenya.
pub const COUNTY_COUNT: usize = COUNTIES.len();

/// Code for an already-folded county name, if it is a known county.
pub fn lookup_code(folded: &str) -> Option<u8> {
    COUNTIES.iter().find_map(|(code, name, aliases)| {
        if super::normalize::fold(name) == folded || aliases.contains(&folded) {
            Some(*code)
        } else {
            None
        }
    })
}

/// Canonical spelling for a county code.
pub fn canonical_name(code: u8) -> Option<&'static str> {
    COUNTIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, _)| *name)
}
