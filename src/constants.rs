pub const GRID: GridSettings = GridSettings {
    page_width: 612.0,
    page_height: 792.0,
    margin: 36.0,
    cell_width: 108.0,
    cell_height: 57.0,
    columns: 5,
    rows: 6,
    grid_gap: 36.0,
};

pub const CARD_SETTINGS: CardSettings = CardSettings {
    min_pool: 200,
    free_space_row: 3,
    free_space_col: 2,
    free_space_label: "FREE SPACE",
    default_title: "BINGO",
    default_cards: 2,
};

pub const SLIDESHOW: SlideshowSettings = SlideshowSettings {
    width: 1280.0,
    height: 720.0,
    padding: 40.0,
    caption_height: 48.0,
};

pub const FILE_NAMES: FileNames = FileNames {
    database: "movies.json",
    backup: "movies.backup.json",
    settings: "settings.json",
    log: "stillframe.log",
    backups_dir: "backups",
};

pub const EXIT_CODES: ExitCodes = ExitCodes {
    unknown: 1,
    database_read: 2,
    stills_dir_missing: 3,
    database_write: 4,
    unexpected: 5,
};

pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

pub const MAX_DATABASE_BACKUPS: usize = 10;

pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct GridSettings {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub columns: usize,
    pub rows: usize,
    pub grid_gap: f32,
}

pub struct CardSettings {
    pub min_pool: usize,
    pub free_space_row: usize,
    pub free_space_col: usize,
    pub free_space_label: &'static str,
    pub default_title: &'static str,
    pub default_cards: usize,
}

pub struct SlideshowSettings {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub caption_height: f32,
}

pub struct FileNames {
    pub database: &'static str,
    pub backup: &'static str,
    pub settings: &'static str,
    pub log: &'static str,
    pub backups_dir: &'static str,
}

pub struct ExitCodes {
    pub unknown: i32,
    pub database_read: i32,
    pub stills_dir_missing: i32,
    pub database_write: i32,
    pub unexpected: i32,
}
