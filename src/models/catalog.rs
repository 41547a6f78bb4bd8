use super::Movie;

/// The fixed catalog every backend recommends from
pub static CATALOG: [Movie; 10] = [
    Movie {
        title: "Krrish",
        plot: "A poor but big-hearted man takes orphans into his home. After discovering his scientist father's invisibility device, he rises to the occasion and fights to save his children and all of India from the clutches of a greedy gangster",
        year: 2006,
        director: "Rakesh Roshan",
        rating: 7.1,
        genre: "science fiction",
    },
    Movie {
        title: "Rang De Basanti",
        plot: "The story of six young Indians who assist an English woman to film a documentary on the freedom fighters from their past, and the events that lead them to relive the long-forgotten saga of freedom",
        year: 2006,
        director: "Rakeysh Omprakash Mehra",
        rating: 9.1,
        genre: "drama",
    },
    Movie {
        title: "Life in a... Metro",
        plot: "A depressed wealthy businessman finds his life changing after he meets a spunky and care-free young woman",
        year: 2007,
        director: "Anurag Basu",
        rating: 6.8,
        genre: "romance",
    },
    Movie {
        title: "Ghoomer",
        plot: "A schoolteacher's world turns upside down when he realizes that his former student, who is now a world-famous artist, may have plagiarized his work",
        year: 2023,
        director: "R. Balki",
        rating: 7.8,
        genre: "drama",
    },
    Movie {
        title: "Dilwale Dulhania Le Jayenge",
        plot: "A man returns to his country in order to marry his childhood sweetheart and proceeds to create misunderstanding between the families",
        year: 1995,
        director: "Aditya Chopra",
        rating: 8.1,
        genre: "romance",
    },
    Movie {
        title: "LOC: Kargil",
        plot: "The story of an Indian army officer guarding a picket alone in the Kargil conflict between India and Pakistan",
        year: 2003,
        director: "J.P. Dutta",
        rating: 7.9,
        genre: "war",
    },
    Movie {
        title: "Sholay",
        plot: "Three young men from different parts of India arrive in Mumbai, seeking fame and fortune",
        year: 1975,
        director: "Ramesh Sippy",
        rating: 8.2,
        genre: "action",
    },
    Movie {
        title: "Maine Pyar Kiya",
        plot: "A simple man from a village falls in love with his new neighbor. He enlists the help of his musical-theater friends to woo the lovely girl-next-door away from her music teacher",
        year: 1990,
        director: "Sooraj Barjatya",
        rating: 7.7,
        genre: "musical",
    },
    Movie {
        title: "Bajrangi Bhaijaan",
        plot: "A young mute girl from Pakistan loses herself in India with no way to head back. A devoted man undertakes the task to get her back to her homeland and unite her with her family",
        year: 2015,
        director: "Kabir Khan",
        rating: 8.0,
        genre: "drama",
    },
    Movie {
        title: "3 Idiots",
        plot: "Three idiots embark on a quest for a lost buddy. This journey takes them on a hilarious and meaningful adventure through memory lane and gives them a chance to relive their college days",
        year: 2009,
        director: "Rajkumar Hirani",
        rating: 9.4,
        genre: "comedy",
    },
];

/// Case-insensitive exact title lookup
pub fn find_by_title(title: &str) -> Option<&'static Movie> {
    let title = title.trim();
    CATALOG.iter().find(|m| m.title.eq_ignore_ascii_case(title))
}
