//! 在庫エンティティの型定義

/// 部署
pub mod department;

/// 従業員
pub mod employee;

/// カテゴリ
pub mod category;

/// 資産
pub mod asset;

pub use asset::{Asset, AssetDetails, AssetStatus, Specifications};
pub use category::Category;
pub use department::Department;
pub use employee::{Employee, EmployeeDetails, EmployeeStatus};
