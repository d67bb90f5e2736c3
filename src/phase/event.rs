//! # 物相集合变更通知
//!
//! 集合管理器在每次修改完成后同步调用已注册的观察者。
//! 顺序和次数是契约的一部分：添加物相先发 `PhaseAdded` 再发
//! `PhaseChanged(新索引)`；联动条件下修改压力对每个物相按索引升序各发一次
//! `PhaseChanged`。
//!
//! 在观察者回调中再次修改集合属于未定义行为，由调用方避免。
//!
//! ## 依赖关系
//! - 被 `phase/collection.rs` 使用

/// 集合变更事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// 追加了一个物相（结构变化）
    PhaseAdded,
    /// 删除了索引处的物相
    PhaseRemoved(usize),
    /// 索引处物相的数值或显示属性变化
    PhaseChanged(usize),
    /// 物相追加了一条反射
    ReflectionAdded(usize),
    /// (物相索引, 反射索引) 处的反射被删除
    ReflectionDeleted(usize, usize),
}

/// 变更观察者
pub trait PhaseObserver {
    fn notify(&mut self, event: &PhaseEvent);
}

impl<F> PhaseObserver for F
where
    F: FnMut(&PhaseEvent),
{
    fn notify(&mut self, event: &PhaseEvent) {
        self(event)
    }
}
