//! 业务服务层，接口与命令行共用
//!
//! 查询类函数对 `ConnectionTrait` 泛型，既可以传连接池也可以传事务；
//! 需要多表写入的操作接收 `DatabaseConnection` 并在内部开启事务。

pub mod account;
pub mod car;
pub mod car_type;
pub mod rental;
pub mod statistics;
