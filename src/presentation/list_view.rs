use crate::domain::entities::Record;
use crate::domain::value_objects::RecordId;
use crate::shared::config::ListConfig;
use std::ops::Range;

/// `paginate` の結果
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    /// クランプ後のページ番号（0 始まり）
    pub index: usize,
    pub page_count: usize,
    pub rows: &'a [T],
}

/// 件数 0 のときは 0
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

pub fn clamp_page_index(index: usize, len: usize, page_size: usize) -> usize {
    index.min(page_count(len, page_size).saturating_sub(1))
}

pub fn paginate<T>(items: &[T], page_index: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let index = clamp_page_index(page_index, items.len(), page_size);
    let start = (index * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        index,
        page_count: page_count(items.len(), page_size),
        rows: &items[start..end],
    }
}

/// 固定行高の仮想スクロールで実体化する行の範囲
pub fn visible_range(
    row_count: usize,
    row_height: u32,
    viewport_height: u32,
    scroll_offset: u32,
    overscan: usize,
) -> Range<usize> {
    if row_count == 0 || row_height == 0 {
        return 0..0;
    }
    let row_height = row_height as usize;
    let first = scroll_offset as usize / row_height;
    let visible = (viewport_height as usize).div_ceil(row_height).max(1);

    let start = first.saturating_sub(overscan).min(row_count);
    let end = first
        .saturating_add(visible)
        .saturating_add(overscan)
        .min(row_count);
    start..end
}

/// 描画対象の行。編集などの操作は位置ではなく `id` で行を指す。
#[derive(Debug, PartialEq)]
pub struct VisibleRow<'a, T> {
    pub id: RecordId,
    /// ページ内の位置
    pub position: usize,
    /// スクロール領域上端からの y 座標
    pub top: u32,
    pub record: &'a T,
}

#[derive(Debug, PartialEq)]
pub struct PageView<'a, T> {
    pub index: usize,
    pub page_count: usize,
    pub total: usize,
    pub content_height: u32,
    pub rows: Vec<VisibleRow<'a, T>>,
}

/// ページ番号とスクロール位置を保持する一覧ビュー。
///
/// 一覧が差し替わってもページ番号は保たれ、範囲外になったときだけクランプされる。
#[derive(Debug, Clone)]
pub struct ListView {
    page_index: usize,
    page_size: usize,
    row_height: u32,
    overscan: usize,
    viewport_height: u32,
    scroll_offset: u32,
}

impl ListView {
    pub fn new(page_size: usize, row_height: u32, overscan: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            row_height,
            overscan,
            viewport_height: row_height.saturating_mul(10),
            scroll_offset: 0,
        }
    }

    pub fn from_config(config: &ListConfig) -> Self {
        Self::new(config.page_size, config.row_height, config.overscan)
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    /// ページを移動し、スクロール位置を先頭へ戻す
    pub fn go_to_page(&mut self, index: usize, len: usize) -> usize {
        let clamped = clamp_page_index(index, len, self.page_size);
        if clamped != self.page_index {
            self.scroll_offset = 0;
        }
        self.page_index = clamped;
        clamped
    }

    pub fn next_page(&mut self, len: usize) -> usize {
        self.go_to_page(self.page_index.saturating_add(1), len)
    }

    pub fn previous_page(&mut self, len: usize) -> usize {
        self.go_to_page(self.page_index.saturating_sub(1), len)
    }

    /// 検索条件が変わったときなど
    pub fn reset(&mut self) {
        self.page_index = 0;
        self.scroll_offset = 0;
    }

    /// 現在の一覧を描画用に切り出す
    pub fn render<'a, T: Record>(&mut self, items: &'a [T]) -> PageView<'a, T> {
        let page = paginate(items, self.page_index, self.page_size);
        self.page_index = page.index;

        let content_height = (page.rows.len() as u32).saturating_mul(self.row_height);
        let max_offset = content_height.saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);

        let range = visible_range(
            page.rows.len(),
            self.row_height,
            self.viewport_height,
            self.scroll_offset,
            self.overscan,
        );
        let rows = page.rows[range.clone()]
            .iter()
            .zip(range)
            .map(|(record, position)| VisibleRow {
                id: record.id(),
                position,
                top: (position as u32).saturating_mul(self.row_height),
                record,
            })
            .collect();

        PageView {
            index: page.index,
            page_count: page.page_count,
            total: items.len(),
            content_height,
            rows,
        }
    }
}
