//! Static text of every section
//!
//! The number of entries in each list is the number of children the surface
//! exposes for the matching staggered reveal.

use keepsake_core::SectionId;

pub const INTRO_TITLE: &str = "Happy Birthday";
pub const INTRO_SUBTITLE: &str = "A little keepsake, made just for you";
pub const BEGIN_LABEL: &str = "[ Press Enter to begin ]";

pub const CENTERPIECE: [&str; 7] = [
    "     i  i  i  i     ",
    "    |:||:||:||:|    ",
    "  __|:||:||:||:|__  ",
    " |~~~~~~~~~~~~~~~~| ",
    " |  *  *  *  *  * | ",
    " |________________| ",
    "  \\______________/  ",
];

pub const POEM_STANZAS: [&[&str]; 4] = [
    &[
        "Another turn around the sun,",
        "another page, another song;",
        "the years have only just begun",
        "to show how bright you've shone along.",
    ],
    &[
        "For every laugh you've freely shared,",
        "for every hand you've helped to hold,",
        "for all the times you simply cared,",
        "this day is yours, in ribbons of gold.",
    ],
    &[
        "May mornings greet you soft and clear,",
        "may evenings find you warm and near",
        "the ones who love you, year by year,",
        "and keep your dearest people here.",
    ],
    &[
        "So light the candles, make a wish,",
        "let petals fall and music play;",
        "of all the gifts, we hope it's this:",
        "a heart as happy as today.",
    ],
];

/// Achievement cards: heading and body
pub const ACHIEVEMENTS: [(&str, &str); 4] = [
    ("Kindest Friend", "Always the first to show up and the last to leave."),
    ("Brave Explorer", "New cities, new trails, new recipes. Never a dull year."),
    ("Master of Laughter", "Turns every ordinary evening into a story worth retelling."),
    ("Heart of Gold", "Gives generously and never keeps score."),
];

/// Gallery polaroids: caption and date line
pub const POLAROIDS: [(&str, &str); 6] = [
    ("Beach sunrise", "summer"),
    ("First concert", "spring"),
    ("Road trip", "autumn"),
    ("Snow day", "winter"),
    ("Graduation", "june"),
    ("Last birthday", "a year ago"),
];

/// Testimonials: quote and author
pub const TESTIMONIALS: [(&str, &str); 3] = [
    ("You make every room feel like home.", "Mum"),
    ("Best adventure buddy anyone could ask for.", "Sam"),
    ("Here's to another year of terrible puns.", "The whole gang"),
];

pub const VIDEO_CAPTION: &str = "A short film of our favourite moments";
pub const VIDEO_HINT: &str = "Press play in your heart";

pub const FINALE_TITLE: &str = "Happy Birthday!";
pub const FINALE_MESSAGE: [&str; 3] = [
    "Thank you for being exactly who you are.",
    "Here's to the year ahead and everything it brings.",
    "With all our love.",
];

/// Heading shown above a section's content
pub fn heading(id: SectionId) -> &'static str {
    match id {
        SectionId::Landing => INTRO_TITLE,
        SectionId::Poem => "A Poem For You",
        SectionId::About => "What Makes You Amazing",
        SectionId::Gallery => "Memories",
        SectionId::Testimonials => "Birthday Wishes",
        SectionId::Video => "A Special Video",
        SectionId::Finale => FINALE_TITLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centerpiece_is_rectangular() {
        let width = CENTERPIECE[0].chars().count();
        assert!(CENTERPIECE.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_every_section_has_heading() {
        for id in SectionId::ALL {
            assert!(!heading(id).is_empty());
        }
    }
}
