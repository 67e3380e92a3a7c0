pub const EBML: u32 = 0x1A45DFA3;
pub const SEGMENT: u32 = 0x18538067;
pub const CLUSTER: u32 = 0x1F43B675;
pub const TIMECODE: u32 = 0xE7;
pub const SIMPLE_BLOCK: u32 = 0xA3;
pub const BLOCK_GROUP: u32 = 0xA0;
pub const BLOCK: u32 = 0xA1;
pub const TRACKS: u32 = 0x1654AE6B;
pub const TRACK_ENTRY: u32 = 0xAE;
pub const TRACK_NUMBER: u32 = 0xD7;
pub const CODEC_ID: u32 = 0x86;
pub const TAGS: u32 = 0x1254C367;
pub const TAG: u32 = 0x7373;
pub const SIMPLE_TAG: u32 = 0x67C8;
pub const TAG_NAME: u32 = 0x45A3;
pub const TAG_STRING: u32 = 0x4487;
pub const VOID: u32 = 0xEC;
pub const CRC32: u32 = 0xBF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Master,
    Data,
}

#[derive(Debug, Clone, Copy)]
pub struct ElementDef {
    pub id: u32,
    pub name: &'static str,
    pub kind: ElementKind,
    /// `None` for global elements which may appear at any level.
    pub level: Option<u8>,
}

const fn master(id: u32, name: &'static str, level: u8) -> ElementDef {
    ElementDef {
        id,
        name,
        kind: ElementKind::Master,
        level: Some(level),
    }
}

const fn data(id: u32, name: &'static str, level: u8) -> ElementDef {
    ElementDef {
        id,
        name,
        kind: ElementKind::Data,
        level: Some(level),
    }
}

const fn global(id: u32, name: &'static str) -> ElementDef {
    ElementDef {
        id,
        name,
        kind: ElementKind::Data,
        level: None,
    }
}

static ELEMENTS: &[ElementDef] = &[
    master(EBML, "EBML", 0),
    data(0x4286, "EBMLVersion", 1),
    data(0x42F7, "EBMLReadVersion", 1),
    data(0x42F2, "EBMLMaxIDLength", 1),
    data(0x42F3, "EBMLMaxSizeLength", 1),
    data(0x4282, "DocType", 1),
    data(0x4287, "DocTypeVersion", 1),
    data(0x4285, "DocTypeReadVersion", 1),
    master(SEGMENT, "Segment", 0),
    master(0x114D9B74, "SeekHead", 1),
    master(0x4DBB, "Seek", 2),
    data(0x53AB, "SeekID", 3),
    data(0x53AC, "SeekPosition", 3),
    master(0x1549A966, "Info", 1),
    data(0x2AD7B1, "TimecodeScale", 2),
    data(0x4489, "Duration", 2),
    data(0x4461, "DateUTC", 2),
    data(0x7BA9, "Title", 2),
    data(0x4D80, "MuxingApp", 2),
    data(0x5741, "WritingApp", 2),
    data(0x73A4, "SegmentUID", 2),
    master(TRACKS, "Tracks", 1),
    master(TRACK_ENTRY, "TrackEntry", 2),
    data(TRACK_NUMBER, "TrackNumber", 3),
    data(0x73C5, "TrackUID", 3),
    data(0x83, "TrackType", 3),
    data(0x536E, "Name", 3),
    data(CODEC_ID, "CodecID", 3),
    data(0x63A2, "CodecPrivate", 3),
    data(0x258688, "CodecName", 3),
    data(0x23E383, "DefaultDuration", 3),
    master(0xE0, "Video", 3),
    data(0xB0, "PixelWidth", 4),
    data(0xBA, "PixelHeight", 4),
    master(0xE1, "Audio", 3),
    data(0xB5, "SamplingFrequency", 4),
    data(0x9F, "Channels", 4),
    master(CLUSTER, "Cluster", 1),
    data(TIMECODE, "Timecode", 2),
    data(SIMPLE_BLOCK, "SimpleBlock", 2),
    master(BLOCK_GROUP, "BlockGroup", 2),
    data(BLOCK, "Block", 3),
    data(0x9B, "BlockDuration", 3),
    master(0x1C53BB6B, "Cues", 1),
    master(0xBB, "CuePoint", 2),
    data(0xB3, "CueTime", 3),
    master(0xB7, "CueTrackPositions", 3),
    master(0x1043A770, "Chapters", 1),
    master(0x1941A469, "Attachments", 1),
    master(TAGS, "Tags", 1),
    master(TAG, "Tag", 2),
    master(0x63C0, "Targets", 3),
    master(SIMPLE_TAG, "SimpleTag", 3),
    data(TAG_NAME, "TagName", 4),
    data(TAG_STRING, "TagString", 4),
    data(0x4485, "TagBinary", 4),
    global(VOID, "Void"),
    global(CRC32, "CRC-32"),
];

pub fn lookup(id: u32) -> Option<&'static ElementDef> {
    ELEMENTS.iter().find(|def| def.id == id)
}
