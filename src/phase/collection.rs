//! # 物相集合管理
//!
//! 有序的物相集合：每个条目同时持有物相记录、派生的反射表、来源路径、
//! 显示颜色和可见性，索引 i 在所有属性上都指向同一个物相。
//!
//! ## 联动条件
//! `same_conditions` 为真（默认）时，修改任一物相的压力或温度会作用到
//! 全部物相，并按索引升序逐个通知；为假时只影响指定物相。
//! `set_pressure_temperature` 始终只作用于指定物相。
//!
//! ## 颜色
//! 管理器持有单调递增的添加计数，新物相颜色为 `color_for(计数 + 9)`，
//! 删除不回收计数。
//!
//! ## 错误
//! 加载失败原样返回 [`PhaseLoadError`]，集合不发生任何变化。
//! 索引越界属于调用方错误，直接 panic。
//!
//! ## 依赖关系
//! - 被 `config.rs` 和 `commands/` 使用
//! - 使用 `phase/` 下的其它模块和 `loaders/`

use super::color::{color_for, Rgb};
use super::event::{PhaseEvent, PhaseObserver};
use super::overlay::{self, PatternUnit, RescaledLines};
use super::params::{EosParams, PhaseParam};
use super::record::PhaseRecord;
use super::reflection::{Reflection, ReflectionTable};
use crate::error::PhaseLoadError;
use crate::loaders::{
    CifConverter, ConversionParams, JcpdsLoader, PhaseFormat, PhaseSource, StructureConverter,
};
use crate::pattern::PatternSource;

use std::fmt;
use std::path::{Path, PathBuf};

/// 颜色编号相对添加计数的偏移
const COLOR_OFFSET: usize = 9;

/// 集合中的一个物相
#[derive(Debug, Clone)]
struct PhaseEntry {
    record: PhaseRecord,
    table: ReflectionTable,
    path: PathBuf,
    format: PhaseFormat,
    /// CIF 来源转换时使用的参数
    conversion: Option<ConversionParams>,
    color: Rgb,
    visible: bool,
}

impl PhaseEntry {
    fn refresh_table(&mut self) {
        self.table = ReflectionTable::derive(&self.record);
    }
}

/// 物相集合管理器
pub struct PhaseCollection {
    entries: Vec<PhaseEntry>,
    same_conditions: bool,
    phases_added: usize,
    observers: Vec<Box<dyn PhaseObserver>>,
}

impl Default for PhaseCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhaseCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseCollection")
            .field("entries", &self.entries)
            .field("same_conditions", &self.same_conditions)
            .field("phases_added", &self.phases_added)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl PhaseCollection {
    pub fn new() -> Self {
        PhaseCollection {
            entries: Vec::new(),
            same_conditions: true,
            phases_added: 0,
            observers: Vec::new(),
        }
    }

    /// 注册观察者；每次修改完成后按注册顺序同步调用
    pub fn subscribe(&mut self, observer: impl PhaseObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ─────────────────────────────────────────────────────────────
    // 读取
    // ─────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&self, index: usize) -> &PhaseRecord {
        &self.entry(index).record
    }

    pub fn reflection_table(&self, index: usize) -> &ReflectionTable {
        &self.entry(index).table
    }

    pub fn path(&self, index: usize) -> &Path {
        &self.entry(index).path
    }

    pub fn format(&self, index: usize) -> PhaseFormat {
        self.entry(index).format
    }

    /// CIF 物相加载时的转换参数；JCPDS 物相为 None
    pub fn conversion(&self, index: usize) -> Option<ConversionParams> {
        self.entry(index).conversion
    }

    pub fn color(&self, index: usize) -> Rgb {
        self.entry(index).color
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.entry(index).visible
    }

    pub fn same_conditions(&self) -> bool {
        self.same_conditions
    }

    pub fn set_same_conditions(&mut self, same_conditions: bool) {
        self.same_conditions = same_conditions;
    }

    /// 历史上成功添加过的物相数
    pub fn phases_added(&self) -> usize {
        self.phases_added
    }

    // ─────────────────────────────────────────────────────────────
    // 添加 / 删除
    // ─────────────────────────────────────────────────────────────

    /// 加载 JCPDS 文件并追加
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<usize, PhaseLoadError> {
        self.add_with(path, &JcpdsLoader)
    }

    /// 用指定加载器加载并追加
    pub fn add_with(
        &mut self,
        path: impl AsRef<Path>,
        source: &dyn PhaseSource,
    ) -> Result<usize, PhaseLoadError> {
        let path = path.as_ref();
        let record = source.load(path)?;
        Ok(self.push(record, path, PhaseFormat::Jcpds, None))
    }

    /// 转换 CIF 结构并追加
    pub fn add_converted(
        &mut self,
        path: impl AsRef<Path>,
        params: &ConversionParams,
    ) -> Result<usize, PhaseLoadError> {
        self.add_converted_with(path, params, &CifConverter)
    }

    /// 用指定转换器转换并追加
    pub fn add_converted_with(
        &mut self,
        path: impl AsRef<Path>,
        params: &ConversionParams,
        converter: &dyn StructureConverter,
    ) -> Result<usize, PhaseLoadError> {
        let path = path.as_ref();
        let record = converter.convert(path, params)?;
        Ok(self.push(record, path, PhaseFormat::Cif, Some(*params)))
    }

    /// 追加一个已经构造好的物相记录，返回新索引；格式按扩展名推断
    pub fn add_record(&mut self, record: PhaseRecord, path: impl AsRef<Path>) -> usize {
        let format = PhaseFormat::from_path(path.as_ref());
        self.push(record, path.as_ref(), format, None)
    }

    /// 按给定的来源格式和转换参数追加（恢复配置时使用）
    pub(crate) fn add_record_as(
        &mut self,
        record: PhaseRecord,
        path: &Path,
        format: PhaseFormat,
        conversion: Option<ConversionParams>,
    ) -> usize {
        self.push(record, path, format, conversion)
    }

    fn push(
        &mut self,
        mut record: PhaseRecord,
        path: &Path,
        format: PhaseFormat,
        conversion: Option<ConversionParams>,
    ) -> usize {
        self.phases_added += 1;
        let color = color_for(self.phases_added + COLOR_OFFSET);

        // 已有至少两个物相时沿用最近一个的条件
        if self.same_conditions && self.entries.len() >= 2 {
            if let Some(last) = self.entries.last() {
                let (pressure, temperature) = (last.record.pressure(), last.record.temperature());
                record.compute_spacing(Some(pressure), Some(temperature));
            }
        }

        let table = ReflectionTable::derive(&record);
        log::debug!(
            "Added phase '{}' from {} ({} reflections, color {})",
            record.name(),
            path.display(),
            table.len(),
            color
        );

        self.entries.push(PhaseEntry {
            record,
            table,
            path: path.to_path_buf(),
            format,
            conversion,
            color,
            visible: true,
        });

        let index = self.entries.len() - 1;
        self.emit(PhaseEvent::PhaseAdded);
        self.emit(PhaseEvent::PhaseChanged(index));
        index
    }

    /// 删除物相，后面的物相索引前移
    ///
    /// # Panics
    /// `index` 越界时 panic。
    pub fn remove(&mut self, index: usize) -> PhaseRecord {
        self.check_index(index);
        let entry = self.entries.remove(index);
        log::debug!("Removed phase '{}' at {}", entry.record.name(), index);
        self.emit(PhaseEvent::PhaseRemoved(index));
        entry.record
    }

    /// 清空集合（逐个删除索引 0）
    pub fn reset(&mut self) {
        while !self.entries.is_empty() {
            self.remove(0);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // 条件与参数
    // ─────────────────────────────────────────────────────────────

    pub fn set_pressure(&mut self, index: usize, pressure: f64) {
        self.check_index(index);
        for i in self.condition_targets(index) {
            let entry = &mut self.entries[i];
            entry.record.set_pressure(pressure);
            entry.refresh_table();
            self.emit(PhaseEvent::PhaseChanged(i));
        }
    }

    /// 没有热膨胀参数的物相温度不变，但仍然发出通知
    pub fn set_temperature(&mut self, index: usize, temperature: f64) {
        self.check_index(index);
        for i in self.condition_targets(index) {
            let entry = &mut self.entries[i];
            if entry.record.set_temperature(temperature) {
                entry.refresh_table();
            } else {
                log::trace!("Phase {} has no thermal expansion, temperature ignored", i);
            }
            self.emit(PhaseEvent::PhaseChanged(i));
        }
    }

    /// 同时设置压力和温度，只作用于 `index`
    pub fn set_pressure_temperature(&mut self, index: usize, pressure: f64, temperature: f64) {
        self.check_index(index);
        let entry = &mut self.entries[index];
        entry.record.set_pressure(pressure);
        entry.record.set_temperature(temperature);
        entry.refresh_table();
        self.emit(PhaseEvent::PhaseChanged(index));
    }

    /// 修改一个原始参数并重算 V0、d0 和 d
    pub fn set_parameter(&mut self, index: usize, param: PhaseParam, value: f64) {
        self.check_index(index);
        let entry = &mut self.entries[index];
        match param {
            PhaseParam::Pressure => entry.record.set_pressure(value),
            PhaseParam::Temperature => {
                entry.record.set_temperature(value);
            }
            _ => entry.record.set_parameter(param, value),
        }
        entry.refresh_table();
        self.emit(PhaseEvent::PhaseChanged(index));
    }

    /// 整体替换参数（包括条件），用于恢复保存的状态
    pub fn set_params(&mut self, index: usize, params: EosParams) {
        self.check_index(index);
        let entry = &mut self.entries[index];
        entry.record.set_params(params);
        entry.refresh_table();
        self.emit(PhaseEvent::PhaseChanged(index));
    }

    pub fn set_color(&mut self, index: usize, color: Rgb) {
        self.check_index(index);
        self.entries[index].color = color;
        self.emit(PhaseEvent::PhaseChanged(index));
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) {
        self.check_index(index);
        self.entries[index].visible = visible;
        self.emit(PhaseEvent::PhaseChanged(index));
    }

    // ─────────────────────────────────────────────────────────────
    // 反射
    // ─────────────────────────────────────────────────────────────

    /// 追加一条空白反射 (000)
    pub fn add_reflection(&mut self, index: usize) {
        self.check_index(index);
        let entry = &mut self.entries[index];
        entry.record.add_reflection(Reflection::blank());
        entry.refresh_table();
        self.emit(PhaseEvent::ReflectionAdded(index));
    }

    /// # Panics
    /// 物相或反射索引越界时 panic。
    pub fn delete_reflection(&mut self, phase: usize, reflection: usize) {
        self.check_index(phase);
        let entry = &mut self.entries[phase];
        entry.record.delete_reflection(reflection);
        entry.refresh_table();
        self.emit(PhaseEvent::ReflectionDeleted(phase, reflection));
    }

    /// 批量删除反射
    ///
    /// 索引按原表计，先排序去重，再依次删除 `indices[i] - i`。
    pub fn delete_reflections(&mut self, phase: usize, indices: &[usize]) {
        self.check_index(phase);
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();

        for (shift, index) in indices.into_iter().enumerate() {
            self.delete_reflection(phase, index - shift);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // 叠加
    // ─────────────────────────────────────────────────────────────

    /// 物相衍射线按当前图谱窗口缩放后的位置和强度
    pub fn rescaled_reflections<P>(
        &self,
        index: usize,
        pattern: &P,
        x_range: (f64, f64),
        y_range: (f64, f64),
        wavelength: f64,
        unit: PatternUnit,
    ) -> RescaledLines
    where
        P: PatternSource + ?Sized,
    {
        overlay::rescale(
            self.reflection_table(index),
            unit,
            wavelength,
            pattern,
            x_range,
            y_range,
        )
    }

    // ─────────────────────────────────────────────────────────────

    fn condition_targets(&self, index: usize) -> std::ops::Range<usize> {
        if self.same_conditions {
            0..self.entries.len()
        } else {
            index..index + 1
        }
    }

    fn entry(&self, index: usize) -> &PhaseEntry {
        self.check_index(index);
        &self.entries[index]
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.entries.len(),
            "phase index {} out of range (collection has {} phases)",
            index,
            self.entries.len()
        );
    }

    fn emit(&mut self, event: PhaseEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::phase::params::Symmetry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn gold(name: &str) -> PhaseRecord {
        let params = EosParams {
            a0: 4.0786,
            k0: 166.65,
            k0p: 5.4823,
            alpha_t0: 4.26e-5,
            ..EosParams::default()
        };
        let reflections = vec![
            Reflection::new(1.0, 1.0, 1.0, 100.0, 0.0),
            Reflection::new(2.0, 0.0, 0.0, 52.0, 0.0),
            Reflection::new(2.0, 2.0, 0.0, 32.0, 0.0),
        ];
        PhaseRecord::new(name, Symmetry::Cubic, params, reflections).unwrap()
    }

    /// 不支持热膨胀的物相
    fn periclase(name: &str) -> PhaseRecord {
        let params = EosParams {
            a0: 4.2112,
            k0: 160.0,
            k0p: 4.15,
            ..EosParams::default()
        };
        let reflections = (0..10)
            .map(|i| Reflection::new(1.0 + i as f64, 1.0, 0.0, 100.0 - i as f64, 0.0))
            .collect();
        PhaseRecord::new(name, Symmetry::Cubic, params, reflections).unwrap()
    }

    fn recorder(collection: &mut PhaseCollection) -> Rc<RefCell<Vec<PhaseEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        collection.subscribe(move |event: &PhaseEvent| sink.borrow_mut().push(*event));
        events
    }

    fn assert_consistent(collection: &PhaseCollection) {
        for i in 0..collection.len() {
            assert_eq!(
                collection.reflection_table(i),
                &ReflectionTable::derive(collection.record(i))
            );
        }
    }

    #[test]
    fn test_add_assigns_colors_and_emits() {
        let mut collection = PhaseCollection::new();
        let events = recorder(&mut collection);

        let a = collection.add_record(gold("a"), "a.jcpds");
        let b = collection.add_record(gold("b"), "b.jcpds");

        assert_eq!((a, b), (0, 1));
        assert_eq!(collection.phases_added(), 2);
        assert_eq!(collection.color(0), color_for(10));
        assert_eq!(collection.color(1), color_for(11));
        assert!(collection.is_visible(1));
        assert_eq!(collection.path(1), Path::new("b.jcpds"));
        assert_eq!(
            *events.borrow(),
            vec![
                PhaseEvent::PhaseAdded,
                PhaseEvent::PhaseChanged(0),
                PhaseEvent::PhaseAdded,
                PhaseEvent::PhaseChanged(1),
            ]
        );
    }

    #[test]
    fn test_entries_stay_parallel() {
        let mut collection = PhaseCollection::new();
        for name in ["a", "b", "c", "d"] {
            collection.add_record(gold(name), format!("{name}.jcpds"));
        }
        collection.remove(1);
        collection.add_record(periclase("e"), "e.jcpds");
        collection.remove(0);
        collection.remove(2);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.record(0).name(), "c");
        assert_eq!(collection.path(0), Path::new("c.jcpds"));
        assert_eq!(collection.record(1).name(), "d");
        assert_eq!(collection.path(1), Path::new("d.jcpds"));
        // 颜色不回收
        assert_eq!(collection.color(1), color_for(13));
        assert_eq!(collection.phases_added(), 5);
        assert_consistent(&collection);
    }

    #[test]
    fn test_linked_pressure_broadcast() {
        let mut collection = PhaseCollection::new();
        for name in ["a", "b", "c"] {
            collection.add_record(gold(name), name);
        }
        let events = recorder(&mut collection);

        collection.set_pressure(1, 25.0);

        for i in 0..3 {
            assert_eq!(collection.record(i).pressure(), 25.0);
        }
        assert_eq!(
            *events.borrow(),
            vec![
                PhaseEvent::PhaseChanged(0),
                PhaseEvent::PhaseChanged(1),
                PhaseEvent::PhaseChanged(2),
            ]
        );
        assert_consistent(&collection);
    }

    #[test]
    fn test_unlinked_pressure_isolated() {
        let mut collection = PhaseCollection::new();
        for name in ["a", "b", "c"] {
            collection.add_record(gold(name), name);
        }
        collection.set_same_conditions(false);
        let before = collection.reflection_table(0).clone();
        let events = recorder(&mut collection);

        collection.set_pressure(2, 40.0);

        assert_eq!(collection.record(2).pressure(), 40.0);
        assert_eq!(collection.record(0).pressure(), 0.0);
        assert_eq!(collection.record(1).pressure(), 0.0);
        assert_eq!(collection.reflection_table(0), &before);
        assert_eq!(*events.borrow(), vec![PhaseEvent::PhaseChanged(2)]);
    }

    #[test]
    fn test_linked_temperature_skips_phases_without_expansion() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("au"), "au");
        collection.add_record(periclase("mgo"), "mgo");
        let mgo_before = collection.reflection_table(1).clone();
        let events = recorder(&mut collection);

        collection.set_temperature(0, 1500.0);

        assert_eq!(collection.record(0).temperature(), 1500.0);
        assert_eq!(collection.record(1).temperature(), 298.0);
        assert_eq!(collection.reflection_table(1), &mgo_before);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_set_pressure_temperature_single_index() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        collection.add_record(gold("b"), "b");
        let events = recorder(&mut collection);

        collection.set_pressure_temperature(1, 10.0, 1000.0);

        assert_eq!(collection.record(1).pressure(), 10.0);
        assert_eq!(collection.record(1).temperature(), 1000.0);
        assert_eq!(collection.record(0).pressure(), 0.0);
        assert_eq!(collection.record(0).temperature(), 298.0);
        assert_eq!(*events.borrow(), vec![PhaseEvent::PhaseChanged(1)]);
    }

    #[test]
    fn test_new_phase_seeded_from_latest_conditions() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        collection.add_record(gold("b"), "b");
        collection.set_pressure(0, 12.0);

        collection.add_record(gold("c"), "c");
        assert_eq!(collection.record(2).pressure(), 12.0);
        assert_eq!(collection.reflection_table(2), collection.reflection_table(0));

        collection.set_same_conditions(false);
        collection.add_record(gold("d"), "d");
        assert_eq!(collection.record(3).pressure(), 0.0);
    }

    #[test]
    fn test_set_parameter_recomputes_table() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        let d_before = collection.reflection_table(0).d_spacings()[0];
        let events = recorder(&mut collection);

        collection.set_parameter(0, PhaseParam::A0, 4.2);

        let d_after = collection.reflection_table(0).d_spacings()[0];
        assert!((d_after / d_before - 4.2 / 4.0786).abs() < 1e-12);
        assert_eq!(*events.borrow(), vec![PhaseEvent::PhaseChanged(0)]);
        assert_consistent(&collection);
    }

    #[test]
    fn test_metadata_changes_emit() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        let events = recorder(&mut collection);

        collection.set_color(0, Rgb::new(1, 2, 3));
        collection.set_visible(0, false);

        assert_eq!(collection.color(0), Rgb::new(1, 2, 3));
        assert!(!collection.is_visible(0));
        assert_eq!(
            *events.borrow(),
            vec![PhaseEvent::PhaseChanged(0), PhaseEvent::PhaseChanged(0)]
        );
    }

    #[test]
    fn test_add_and_delete_single_reflection() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        let events = recorder(&mut collection);

        collection.add_reflection(0);
        assert_eq!(collection.reflection_table(0).len(), 4);
        assert_eq!(collection.reflection_table(0).rows()[3][2..], [0.0, 0.0, 0.0]);

        collection.delete_reflection(0, 1);
        assert_eq!(collection.reflection_table(0).len(), 3);
        assert_eq!(collection.reflection_table(0).rows()[1][2..], [2.0, 2.0, 0.0]);
        assert_eq!(
            *events.borrow(),
            vec![
                PhaseEvent::ReflectionAdded(0),
                PhaseEvent::ReflectionDeleted(0, 1),
            ]
        );
    }

    #[test]
    fn test_bulk_delete_matches_sequential() {
        let mut bulk = PhaseCollection::new();
        bulk.add_record(periclase("a"), "a");
        let events = recorder(&mut bulk);
        bulk.delete_reflections(0, &[5, 2, 8, 5]);

        let mut sequential = PhaseCollection::new();
        sequential.add_record(periclase("a"), "a");
        sequential.delete_reflection(0, 2);
        sequential.delete_reflection(0, 4);
        sequential.delete_reflection(0, 6);

        assert_eq!(bulk.reflection_table(0).len(), 7);
        assert_eq!(bulk.reflection_table(0), sequential.reflection_table(0));
        let kept: Vec<f64> = bulk
            .reflection_table(0)
            .rows()
            .iter()
            .map(|row| row[2])
            .collect();
        assert_eq!(kept, vec![1.0, 2.0, 4.0, 5.0, 7.0, 8.0, 10.0]);
        assert_eq!(
            *events.borrow(),
            vec![
                PhaseEvent::ReflectionDeleted(0, 2),
                PhaseEvent::ReflectionDeleted(0, 4),
                PhaseEvent::ReflectionDeleted(0, 6),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bulk_delete_checks_phase_index() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        collection.delete_reflections(3, &[]);
    }

    #[test]
    fn test_reset_removes_from_front() {
        let mut collection = PhaseCollection::new();
        for name in ["a", "b", "c"] {
            collection.add_record(gold(name), name);
        }
        let events = recorder(&mut collection);
        collection.reset();

        assert!(collection.is_empty());
        assert_eq!(collection.phases_added(), 3);
        assert_eq!(
            *events.borrow(),
            vec![PhaseEvent::PhaseRemoved(0); 3]
        );
    }

    #[test]
    fn test_failed_load_leaves_collection_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.jcpds");
        std::fs::write(&bad, "VERSION: 4\nSYMMETRY: CUBIC\nA: 0\n").unwrap();

        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        let events = recorder(&mut collection);

        let err = collection.add(&bad).unwrap_err();
        assert_eq!(err.path, bad.display().to_string());
        let err = collection
            .add_converted(dir.path().join("missing.cif"), &ConversionParams::default())
            .unwrap_err();
        assert!(err.path.ends_with("missing.cif"));

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.phases_added(), 1);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_add_from_jcpds_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("au.jcpds");
        crate::loaders::jcpds::write_jcpds_file(&gold("au"), &path).unwrap();

        let mut collection = PhaseCollection::new();
        let index = collection.add(&path).unwrap();
        assert_eq!(collection.record(index).name(), "au");
        assert_eq!(collection.format(index), PhaseFormat::Jcpds);
        assert_eq!(collection.conversion(index), None);
        assert_eq!(collection.reflection_table(index).len(), 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        collection.set_pressure(1, 1.0);
    }

    #[test]
    fn test_rescaled_reflections_uses_phase_table() {
        let mut collection = PhaseCollection::new();
        collection.add_record(gold("a"), "a");
        let pattern = Pattern::new("empty", vec![], vec![]).unwrap();

        let lines = collection.rescaled_reflections(
            0,
            &pattern,
            (0.0, 1.0),
            (5.0, 10.0),
            0.31,
            PatternUnit::D,
        );
        assert_eq!(lines.positions, collection.reflection_table(0).d_spacings());
        assert_eq!(lines.intensities, vec![105.0, 57.0, 37.0]);
        assert_eq!(lines.baseline, 5.0);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut collection = PhaseCollection::new();
        let events = recorder(&mut collection);

        collection.add_record(gold("A"), "A.jcpds");
        assert_eq!(collection.phases_added(), 1);
        assert_eq!(collection.color(0), color_for(10));

        collection.add_record(gold("B"), "B.jcpds");
        assert_eq!(collection.phases_added(), 2);
        assert_eq!(collection.color(1), color_for(11));

        events.borrow_mut().clear();
        collection.set_pressure(1, 10.0);
        assert_eq!(collection.record(0).pressure(), 10.0);
        assert_eq!(collection.record(1).pressure(), 10.0);
        assert_eq!(
            *events.borrow(),
            vec![PhaseEvent::PhaseChanged(0), PhaseEvent::PhaseChanged(1)]
        );

        collection.remove(0);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.record(0).name(), "B");
        assert_eq!(collection.path(0), Path::new("B.jcpds"));
    }
}
