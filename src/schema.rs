use getset::Getters;
use serde::{ser::SerializeStruct, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};
use typed_builder::TypedBuilder;

/// One entry of the ranking listing.
/// Built once by the parser and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Debug, Getters, TypedBuilder)]
#[getset(get = "pub")]
pub struct Record {
    #[builder(setter(into))]
    detail_link: String,
    #[builder(setter(into))]
    image_link: String,
    title: Title,
    #[builder(setter(into))]
    rating: String,
    #[builder(setter(into))]
    rating_count: String,
    #[builder(default, setter(into))]
    tagline: String,
    #[builder(setter(into))]
    summary: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Title {
    Single(String),
    Dual { primary: String, secondary: String },
}

impl Title {
    pub fn primary(&self) -> &str {
        match self {
            Title::Single(primary) | Title::Dual { primary, .. } => primary,
        }
    }

    /// Empty when the entry has only one title.
    pub fn secondary(&self) -> &str {
        match self {
            Title::Single(_) => "",
            Title::Dual { secondary, .. } => secondary,
        }
    }
}

/// Output columns, in the order they are written.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, EnumCount, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    DetailLink,
    ImageLink,
    PrimaryTitle,
    SecondaryTitle,
    Rating,
    RatingCount,
    Tagline,
    Summary,
}

impl Column {
    /// Header label written in the first row.
    pub fn label(self) -> &'static str {
        use Column::*;
        match self {
            DetailLink => "电影详情链接",
            ImageLink => "图片链接",
            PrimaryTitle => "影片中文名",
            SecondaryTitle => "影片外国名",
            Rating => "评分",
            RatingCount => "评价数",
            Tagline => "概况",
            Summary => "相关信息",
        }
    }

    pub fn field_name(self) -> &'static str {
        self.into()
    }

    pub fn labels() -> impl Iterator<Item = &'static str> {
        Column::iter().map(Column::label)
    }
}

impl Record {
    pub fn primary_title(&self) -> &str {
        self.title.primary()
    }

    pub fn secondary_title(&self) -> &str {
        self.title.secondary()
    }

    pub fn cell(&self, column: Column) -> &str {
        use Column::*;
        match column {
            DetailLink => &self.detail_link,
            ImageLink => &self.image_link,
            PrimaryTitle => self.primary_title(),
            SecondaryTitle => self.secondary_title(),
            Rating => &self.rating,
            RatingCount => &self.rating_count,
            Tagline => &self.tagline,
            Summary => &self.summary,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &str> {
        Column::iter().map(|column| self.cell(column))
    }
}

// Flattened into the eight columns so that every output format agrees on the shape.
impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Record", Column::COUNT)?;
        for column in Column::iter() {
            state.serialize_field(column.field_name(), self.cell(column))?;
        }
        state.end()
    }
}
